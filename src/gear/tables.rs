use crate::gear::control::GearCtl;
use crate::gear::host::GearHost;
use crate::gear::normal as n;
use crate::gear::special as s;

pub type CommandHandler = fn(&mut GearCtl, &mut dyn GearHost);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Response {
    None,
    /// Always answer
    Send,
    /// Answer if the handler asked for it
    Flag,
}

/// How a command is executed
#[derive(Copy, Clone)]
pub struct CommandEntry {
    pub name: &'static str,
    pub handler: Option<CommandHandler>,
    /// Must be received twice within the repeat window
    pub repeat: bool,
    pub response: Response,
    /// Only executed while the initialisation window is open
    pub init_window: bool,
    /// Only executed directly after a matching ENABLE DEVICE TYPE
    pub device_type: bool,
}

impl CommandEntry {
    pub const UNUSED: CommandEntry = CommandEntry {
        name: "RESERVED",
        handler: None,
        repeat: false,
        response: Response::None,
        init_window: false,
        device_type: false,
    };

    const fn cmd(name: &'static str, handler: CommandHandler) -> CommandEntry {
        CommandEntry {
            name,
            handler: Some(handler),
            ..Self::UNUSED
        }
    }

    const fn twice(mut self) -> Self {
        self.repeat = true;
        self
    }

    const fn send(mut self) -> Self {
        self.response = Response::Send;
        self
    }

    const fn flag(mut self) -> Self {
        self.response = Response::Flag;
        self
    }

    const fn in_window(mut self) -> Self {
        self.init_window = true;
        self
    }

    const fn dt(mut self) -> Self {
        self.device_type = true;
        self
    }

    pub fn is_used(&self) -> bool {
        self.handler.is_some()
    }
}

impl std::fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandEntry")
            .field("name", &self.name)
            .field("repeat", &self.repeat)
            .field("response", &self.response)
            .field("init_window", &self.init_window)
            .field("device_type", &self.device_type)
            .finish()
    }
}

/// Direct arc power, not part of any table
pub static ARC_POWER: CommandEntry = CommandEntry::cmd("DAPC", n::arc_power);

macro_rules! fill {
    ($table: ident, $first: expr, $entry: expr) => {
        let mut i = 0;
        while i < 16 {
            $table[$first + i] = $entry;
            i += 1;
        }
    };
}

const fn normal_table() -> [CommandEntry; 256] {
    use self::CommandEntry as E;
    let mut t = [E::UNUSED; 256];
    t[0x00] = E::cmd("OFF", n::off);
    t[0x01] = E::cmd("UP", n::up);
    t[0x02] = E::cmd("DOWN", n::down);
    t[0x03] = E::cmd("STEP UP", n::step_up);
    t[0x04] = E::cmd("STEP DOWN", n::step_down);
    t[0x05] = E::cmd("RECALL MAX LEVEL", n::recall_max_level);
    t[0x06] = E::cmd("RECALL MIN LEVEL", n::recall_min_level);
    t[0x07] = E::cmd("STEP DOWN AND OFF", n::step_down_and_off);
    t[0x08] = E::cmd("ON AND STEP UP", n::on_and_step_up);
    t[0x09] = E::cmd("ENABLE DAPC SEQUENCE", n::enable_dapc_sequence);
    fill!(t, 0x10, E::cmd("GO TO SCENE", n::go_to_scene));

    t[0x20] = E::cmd("RESET", n::reset).twice();
    t[0x21] = E::cmd("STORE ACTUAL LEVEL IN DTR0", n::store_actual_level_in_dtr).twice();
    t[0x2a] = E::cmd("SET MAX LEVEL", n::store_dtr_as_max_level).twice();
    t[0x2b] = E::cmd("SET MIN LEVEL", n::store_dtr_as_min_level).twice();
    t[0x2c] = E::cmd("SET SYSTEM FAILURE LEVEL", n::store_dtr_as_system_failure_level).twice();
    t[0x2d] = E::cmd("SET POWER ON LEVEL", n::store_dtr_as_power_on_level).twice();
    t[0x2e] = E::cmd("SET FADE TIME", n::store_dtr_as_fade_time).twice();
    t[0x2f] = E::cmd("SET FADE RATE", n::store_dtr_as_fade_rate).twice();
    fill!(t, 0x40, E::cmd("SET SCENE", n::store_dtr_as_scene).twice());
    fill!(t, 0x50, E::cmd("REMOVE FROM SCENE", n::remove_from_scene).twice());
    fill!(t, 0x60, E::cmd("ADD TO GROUP", n::add_to_group).twice());
    fill!(t, 0x70, E::cmd("REMOVE FROM GROUP", n::remove_from_group).twice());
    t[0x80] = E::cmd("SET SHORT ADDRESS", n::store_dtr_as_short_address).twice();
    t[0x81] = E::cmd("ENABLE WRITE MEMORY", n::enable_write_memory).twice();

    t[0x90] = E::cmd("QUERY STATUS", n::query_status).send();
    t[0x91] = E::cmd("QUERY CONTROL GEAR PRESENT", n::query_control_gear_present).send();
    t[0x92] = E::cmd("QUERY LAMP FAILURE", n::query_lamp_failure).flag();
    t[0x93] = E::cmd("QUERY LAMP POWER ON", n::query_lamp_power_on).flag();
    t[0x94] = E::cmd("QUERY LIMIT ERROR", n::query_limit_error).flag();
    t[0x95] = E::cmd("QUERY RESET STATE", n::query_reset_state).flag();
    t[0x96] = E::cmd("QUERY MISSING SHORT ADDRESS", n::query_missing_short_address).flag();
    t[0x97] = E::cmd("QUERY VERSION NUMBER", n::query_version_number).send();
    t[0x98] = E::cmd("QUERY CONTENT DTR0", n::query_content_dtr0).send();
    t[0x99] = E::cmd("QUERY DEVICE TYPE", n::query_device_type).send();
    t[0x9a] = E::cmd("QUERY PHYSICAL MINIMUM", n::query_physical_minimum).send();
    t[0x9b] = E::cmd("QUERY POWER FAILURE", n::query_power_failure).flag();
    t[0x9c] = E::cmd("QUERY CONTENT DTR1", n::query_content_dtr1).send();
    t[0x9d] = E::cmd("QUERY CONTENT DTR2", n::query_content_dtr2).send();

    t[0xa0] = E::cmd("QUERY ACTUAL LEVEL", n::query_actual_level).send();
    t[0xa1] = E::cmd("QUERY MAX LEVEL", n::query_max_level).send();
    t[0xa2] = E::cmd("QUERY MIN LEVEL", n::query_min_level).send();
    t[0xa3] = E::cmd("QUERY POWER ON LEVEL", n::query_power_on_level).send();
    t[0xa4] = E::cmd("QUERY SYSTEM FAILURE LEVEL", n::query_system_failure_level).send();
    t[0xa5] = E::cmd("QUERY FADE TIME/FADE RATE", n::query_fade).send();
    fill!(t, 0xb0, E::cmd("QUERY SCENE LEVEL", n::query_scene_level).send());
    t[0xc0] = E::cmd("QUERY GROUPS 0-7", n::query_groups_0_7).send();
    t[0xc1] = E::cmd("QUERY GROUPS 8-15", n::query_groups_8_15).send();
    t[0xc2] = E::cmd("QUERY RANDOM ADDRESS H", n::query_random_address_h).send();
    t[0xc3] = E::cmd("QUERY RANDOM ADDRESS M", n::query_random_address_m).send();
    t[0xc4] = E::cmd("QUERY RANDOM ADDRESS L", n::query_random_address_l).send();
    t[0xc5] = E::cmd("READ MEMORY LOCATION", n::read_memory_location).flag();

    t[0xe0] = E::cmd("REFERENCE SYSTEM POWER", n::reference_system_power).dt().twice();
    t[0xe1] = E::cmd("ENABLE CURRENT PROTECTOR", n::enable_current_protector).dt().twice();
    t[0xe2] = E::cmd("DISABLE CURRENT PROTECTOR", n::disable_current_protector).dt().twice();
    t[0xe3] = E::cmd("SELECT DIMMING CURVE", n::select_dimming_curve).dt().twice();
    t[0xe4] = E::cmd("STORE DTR AS FAST FADE TIME", n::store_dtr_as_fast_fade_time).dt().twice();
    t[0xed] = E::cmd("QUERY GEAR TYPE", n::query_gear_type).dt().send();
    t[0xee] = E::cmd("QUERY DIMMING CURVE", n::query_dimming_curve).dt().send();
    t[0xef] = E::cmd("QUERY POSSIBLE OPERATING MODES", n::query_possible_operating_modes).dt().send();
    t[0xf0] = E::cmd("QUERY FEATURES", n::query_features).dt().send();
    t[0xf1] = E::cmd("QUERY FAILURE STATUS", n::query_failure_status).dt().send();
    t[0xf2] = E::cmd("QUERY SHORT CIRCUIT", n::query_short_circuit).dt().flag();
    t[0xf3] = E::cmd("QUERY OPEN CIRCUIT", n::query_open_circuit).dt().flag();
    t[0xf4] = E::cmd("QUERY LOAD DECREASE", n::query_load_decrease).dt().flag();
    t[0xf5] = E::cmd("QUERY LOAD INCREASE", n::query_load_increase).dt().flag();
    t[0xf6] = E::cmd("QUERY CURRENT PROTECTOR ACTIVE", n::query_current_protector_active).dt().flag();
    t[0xf7] = E::cmd("QUERY THERMAL SHUTDOWN", n::query_thermal_shutdown).dt().flag();
    t[0xf8] = E::cmd("QUERY THERMAL OVERLOAD", n::query_thermal_overload).dt().flag();
    t[0xf9] = E::cmd("QUERY REFERENCE RUNNING", n::query_reference_running).dt().flag();
    t[0xfa] = E::cmd("QUERY REFERENCE MEASUREMENT FAILED", n::query_reference_measurement_failed).dt().flag();
    t[0xfb] = E::cmd("QUERY CURRENT PROTECTOR ENABLED", n::query_current_protector_enabled).dt().flag();
    t[0xfc] = E::cmd("QUERY OPERATING MODE", n::query_operating_mode).dt().send();
    t[0xfd] = E::cmd("QUERY FAST FADE TIME", n::query_fast_fade_time).dt().send();
    t[0xfe] = E::cmd("QUERY MIN FAST FADE TIME", n::query_min_fast_fade_time).dt().send();
    t[0xff] = E::cmd("QUERY EXTENDED VERSION NUMBER", n::query_extended_version_number).dt().send();
    t
}

/// Indexed by the second byte of an addressed command
pub static NORMAL: [CommandEntry; 256] = normal_table();

/// Indexed by bits 1-4 of the first byte, 0xa1 to 0xbf
pub static SPECIAL: [CommandEntry; 16] = {
    use self::CommandEntry as E;
    let mut t = [E::UNUSED; 16];
    t[0] = E::cmd("TERMINATE", s::terminate);
    t[1] = E::cmd("DTR0", s::set_dtr0);
    t[2] = E::cmd("INITIALISE", s::initialise).twice();
    t[3] = E::cmd("RANDOMISE", s::randomise).twice().in_window();
    t[4] = E::cmd("COMPARE", s::compare).flag().in_window();
    t[5] = E::cmd("WITHDRAW", s::withdraw).in_window();
    t[8] = E::cmd("SEARCHADDRH", s::search_address_h).in_window();
    t[9] = E::cmd("SEARCHADDRM", s::search_address_m).in_window();
    t[10] = E::cmd("SEARCHADDRL", s::search_address_l).in_window();
    t[11] = E::cmd("PROGRAM SHORT ADDRESS", s::program_short_address).in_window();
    t[12] = E::cmd("VERIFY SHORT ADDRESS", s::verify_short_address).flag().in_window();
    t[13] = E::cmd("QUERY SHORT ADDRESS", s::query_short_address).flag().in_window();
    t[14] = E::cmd("PHYSICAL SELECTION", s::physical_selection).in_window();
    t
};

/// Index of WRITE MEMORY LOCATION in the extended table
pub const WRITE_MEMORY_LOCATION: u8 = 3;
pub const WRITE_MEMORY_LOCATION_NO_REPLY: u8 = 4;

/// Indexed by bits 1-4 of the first byte, 0xc1 to 0xdf
pub static EXTENDED: [CommandEntry; 16] = {
    use self::CommandEntry as E;
    let mut t = [E::UNUSED; 16];
    t[0] = E::cmd("ENABLE DEVICE TYPE", s::enable_device_type);
    t[1] = E::cmd("DTR1", s::set_dtr1);
    t[2] = E::cmd("DTR2", s::set_dtr2);
    t[WRITE_MEMORY_LOCATION as usize] = E::cmd("WRITE MEMORY LOCATION", s::write_memory_location).flag();
    t[WRITE_MEMORY_LOCATION_NO_REPLY as usize] =
        E::cmd("WRITE MEMORY LOCATION - NO REPLY", s::write_memory_location_no_reply);
    t
};
