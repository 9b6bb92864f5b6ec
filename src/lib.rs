pub mod error;
pub mod config;

pub mod common {
    pub mod address;
    pub mod defs;
}

pub mod gear {
    pub mod cmd_defs;
    pub mod control;
    pub mod dispatch;
    pub mod fade;
    pub mod handler;
    pub mod host;
    pub mod normal;
    pub mod params;
    pub mod special;
    pub mod status;
    pub mod tables;
}

pub mod sim {
    pub mod gear_sim;
    pub mod sim_host;
    #[cfg(feature = "simulator")]
    pub mod bus;
    #[cfg(test)]
    mod test;
}

pub mod utils {
    pub mod frame;
}
