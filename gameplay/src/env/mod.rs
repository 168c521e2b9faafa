pub mod specials;
