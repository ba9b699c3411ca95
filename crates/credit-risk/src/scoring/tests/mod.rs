mod artifact;
mod common;
