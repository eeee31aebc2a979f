//! Request and response bodies

pub mod evp;
