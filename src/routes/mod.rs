pub mod esi;
pub mod health;
