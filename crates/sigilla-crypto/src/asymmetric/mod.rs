pub mod mldsa;
pub mod rsa;
