#![allow(dead_code, unused_imports)]

mod mocks;

pub use mocks::*;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
