mod common;
mod reporting;
