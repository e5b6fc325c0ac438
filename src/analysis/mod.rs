pub mod accuracy;
pub mod coverage;
pub mod ensemble;
pub mod monthly_stats;
pub mod normals;
pub mod smoothing;
