mod builder;
mod tasks;

pub use builder::DatasetBuilder;
pub use tasks::{
    comment_generation_inputs, defect_location_inputs, fix_generation_inputs,
    review_necessity_inputs,
};
