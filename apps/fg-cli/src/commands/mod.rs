pub mod audit;
pub mod call;
pub mod whoami;
