pub mod db;
pub mod productdb;
pub mod profiledb;
pub mod userdb;
