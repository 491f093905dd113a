#![no_std]

pub mod interfaces;
pub mod roles;
pub mod ttl;
