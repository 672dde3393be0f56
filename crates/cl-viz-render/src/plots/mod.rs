pub mod heatmap;
pub mod llr_distribution;
pub mod yields;

mod axes_draw;
