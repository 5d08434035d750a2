use candle_core::Result;
use candle_nn::{Activation, Sequential, VarBuilder, linear, seq};

/// Stacks `Linear -> ReLU` blocks of the given widths. Returns the network together with the
/// width of its output, which is `input_dim` when `layers` is empty.
pub fn build_sequential(
    input_dim: usize,
    layers: &[usize],
    vb: &VarBuilder,
    prefix: &str,
) -> Result<(Sequential, usize)> {
    let mut last_dim = input_dim;
    let mut nn = seq();
    for (layer_idx, layer_size) in layers.iter().enumerate() {
        let layer_pp = format!("{prefix}{layer_idx}");
        nn = nn
            .add(linear(last_dim, *layer_size, vb.pp(layer_pp))?)
            .add(Activation::Relu);
        last_dim = *layer_size;
    }
    Ok((nn, last_dim))
}
