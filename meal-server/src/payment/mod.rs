//! 模拟支付

pub mod simulator;

pub use simulator::{CardDetails, PaymentReceipt, PaymentRequest, PaymentSimulator};
