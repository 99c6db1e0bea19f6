use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct TextClassifierConfig {
    pub vocab_size:  usize,
    pub max_seq_len: usize,
    pub d_model:     usize,
    pub num_heads:   usize,
    pub num_layers:  usize,
    pub d_ff:        usize,
    pub num_classes: usize,
    #[config(default = 0.1)]
    pub dropout:     f64,
    /// When true the encoder output is detached before the head,
    /// so only the classification head receives gradients
    /// (the HeadOnly fine-tune strategy).
    #[config(default = false)]
    pub freeze_encoder: bool,
}

impl TextClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TextClassifierModel<B> {
        let token_embedding    = EmbeddingConfig::new(self.vocab_size, self.d_model).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_seq_len, self.d_model).init(device);
        let layers: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let final_norm = LayerNormConfig::new(self.d_model).init(device);
        let classifier = LinearConfig::new(self.d_model, self.num_classes).init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();
        TextClassifierModel {
            token_embedding, position_embedding, layers,
            final_norm, classifier, dropout,
            freeze_encoder: self.freeze_encoder,
        }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn   = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    /// x: [batch, seq_len, d_model]; pad_mask true where padding
    pub fn forward(&self, x: Tensor<B, 3>, pad_mask: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let attn_input  = MhaInput::self_attn(x.clone()).mask_pad(pad_mask);
        let attn_output = self.self_attn.forward(attn_input).context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

#[derive(Module, Debug)]
pub struct TextClassifierModel<B: Backend> {
    pub token_embedding:    Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub layers:             Vec<EncoderBlock<B>>,
    pub final_norm:         LayerNorm<B>,
    pub classifier:         Linear<B>,
    pub dropout:            Dropout,
    pub freeze_encoder:     bool,
}

impl<B: Backend> TextClassifierModel<B> {
    /// input_ids, attention_mask: [batch, seq_len]
    /// → class logits: [batch, num_classes]
    pub fn forward(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> Tensor<B, 2> {
        let [batch_size, seq_len] = input_ids.dims();

        let tok_emb = self.token_embedding.forward(input_ids);

        // Self-attention is permutation-invariant, so position must be injected explicitly.
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &tok_emb.device())
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        // Padding positions carry no information; mask them out of
        // attention so short texts are not polluted by pad tokens.
        let pad_mask = attention_mask.clone().equal_elem(0);

        let mut x = self.dropout.forward(tok_emb + pos_emb);
        for layer in &self.layers {
            x = layer.forward(x, pad_mask.clone());
        }
        let x = self.final_norm.forward(x); // [batch, seq_len, d_model]

        // Masked mean pooling: average hidden states over real
        // tokens only, then divide by the per-row token count.
        let mask_f  = attention_mask.float(); // [batch, seq_len]
        let weights = mask_f.clone().unsqueeze_dim::<3>(2); // [batch, seq_len, 1]
        let summed  = (x * weights).sum_dim(1).squeeze::<2>(1); // [batch, d_model]
        let counts  = mask_f.sum_dim(1).clamp_min(1.0); // [batch, 1]
        let pooled  = summed / counts;

        // Single dispatch point of the fine-tune strategy: a
        // detached encoder output stops gradients at the head.
        let pooled = if self.freeze_encoder { pooled.detach() } else { pooled };

        self.classifier.forward(self.dropout.forward(pooled))
    }

    /// Forward pass plus cross-entropy loss.
    ///
    /// The model is the single owner of the loss criterion —
    /// training and evaluation both consume this, so the loss is
    /// computed exactly once per batch.
    pub fn forward_loss(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
        targets:        Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(input_ids, attention_mask);
        let ce = CrossEntropyLossConfig::new().init(&logits.device());
        let loss = ce.forward(logits.clone(), targets);
        (loss, logits)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::NdArrayDevice;
    use burn::backend::NdArray;

    fn tiny_config(num_classes: usize) -> TextClassifierConfig {
        TextClassifierConfig::new(32, 8, 16, 2, 1, 32, num_classes)
    }

    fn dummy_batch(device: &NdArrayDevice) -> (Tensor<NdArray, 2, Int>, Tensor<NdArray, 2, Int>) {
        // Two rows, eight tokens each, second row half padding
        let ids: Vec<i32>  = vec![2, 5, 6, 7, 8, 9, 10, 3, 2, 5, 6, 3, 0, 0, 0, 0];
        let mask: Vec<i32> = vec![1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0];
        let input_ids = Tensor::<NdArray, 1, Int>::from_ints(ids.as_slice(), device)
            .reshape([2, 8]);
        let attention_mask = Tensor::<NdArray, 1, Int>::from_ints(mask.as_slice(), device)
            .reshape([2, 8]);
        (input_ids, attention_mask)
    }

    #[test]
    fn logits_have_one_column_per_class() {
        let device = NdArrayDevice::default();
        let model: TextClassifierModel<NdArray> = tiny_config(4).init(&device);
        let (input_ids, attention_mask) = dummy_batch(&device);

        let logits = model.forward(input_ids, attention_mask);
        assert_eq!(logits.dims(), [2, 4]);
    }

    #[test]
    fn loss_is_finite_and_non_negative() {
        let device = NdArrayDevice::default();
        let model: TextClassifierModel<NdArray> = tiny_config(3).init(&device);
        let (input_ids, attention_mask) = dummy_batch(&device);
        let targets = Tensor::<NdArray, 1, Int>::from_ints([0, 2].as_slice(), &device);

        let (loss, logits) = model.forward_loss(input_ids, attention_mask, targets);
        let loss: f64 = loss.into_scalar().elem();
        assert!(loss.is_finite());
        assert!(loss >= 0.0);
        assert_eq!(logits.dims(), [2, 3]);
    }
}
