pub mod extension;

pub mod model;

pub mod operation;
