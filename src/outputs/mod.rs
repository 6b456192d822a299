pub mod simulated_host;
