//! Tensor packing and unpacking around the ONNX model.

pub mod post;
pub mod pre;
