pub mod cbfs;
