mod auth;
mod courses;
mod quiz;
mod simplify;
