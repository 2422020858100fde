pub mod aco;
pub mod adaptive;
pub mod ga;
pub mod rl;
pub mod vrp;
