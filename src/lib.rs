pub mod chart;
pub mod excel;
pub mod merge;
pub mod report;
pub mod utils;
