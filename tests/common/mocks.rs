//! Mock versions of an output file and of the host operation context.
use mockall::mock;

use std::io::{self, Write};

use ee_subsystem::core::extension::OperationContext;
use ee_subsystem::core::model::ModelNode;

mock! {
    pub File {}
    impl Write for File {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
        fn flush(&mut self) -> io::Result<()>;
    }
}

mock! {
    pub Context {}
    impl OperationContext for Context {
        fn read_model(&self) -> ModelNode;
        fn write_model(&mut self, model: ModelNode);
        fn add_result(&mut self, result: ModelNode);
        fn complete_step(&mut self);
    }
}
