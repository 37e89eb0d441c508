pub mod approval;
pub mod banner;
