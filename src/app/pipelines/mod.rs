pub mod attendance_pipeline;

pub use attendance_pipeline::AttendancePipeline;
