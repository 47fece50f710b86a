#![allow(dead_code)]

pub mod ckd_env;
pub mod dataset;
