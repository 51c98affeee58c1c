pub mod batch_executor;
pub mod count_images_use_case;
pub mod count_individuals_use_case;
pub mod infrastructure;
pub mod pipeline_logger;
