pub mod openssl_legacy;
