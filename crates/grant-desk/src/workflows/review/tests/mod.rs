mod common;
mod lifecycle;
mod rubric;
mod workload;
