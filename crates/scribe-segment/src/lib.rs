mod segmenter;

pub use segmenter::{Segmentation, Segmenter};
