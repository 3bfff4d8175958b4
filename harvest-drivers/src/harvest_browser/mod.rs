pub mod behavioral;
pub mod driver;
pub mod evasion;
pub mod page;
