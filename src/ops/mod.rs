pub mod check;
pub mod propagate;
pub mod search;
pub mod slot_ops;
pub mod splice;
pub mod task_ops;
