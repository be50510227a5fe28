pub mod activity;
pub mod cache;
pub mod db;
pub mod identity;
pub mod mail;
