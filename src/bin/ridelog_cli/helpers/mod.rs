// ABOUTME: Helper modules for ridelog-cli
// ABOUTME: Output formatting shared by all commands

pub mod output;
