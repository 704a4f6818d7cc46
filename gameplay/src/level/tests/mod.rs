mod builder_tests;
mod sight_tests;
