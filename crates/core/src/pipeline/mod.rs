pub mod annotate_image_use_case;
pub mod annotate_sequence_use_case;
pub mod infrastructure;
pub mod pipeline_executor;
pub mod pipeline_logger;
