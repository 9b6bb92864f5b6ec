use crate::common::address::{classify, FrameClass};
use crate::common::defs::{MASK, NORMAL_INDIRECT_LEVEL_MAX};
use crate::gear::control::{GearCtl, PhysicalSelection};
use crate::gear::host::{GearHost, TimerSlot};
use crate::gear::params::{GearParams, ParamId};
use crate::gear::tables::{
    CommandEntry, Response, ARC_POWER, EXTENDED, NORMAL, SPECIAL, WRITE_MEMORY_LOCATION,
    WRITE_MEMORY_LOCATION_NO_REPLY,
};
use log::{debug, info};

/// Follow up action requested by the dispatcher
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParseStatus {
    None,
    /// Open the repeat window
    Request100msTimer,
    SendResponse,
    ClearAllTimers,
    /// Keep the DAPC sequence alive
    Request200msTimer,
}

/// Command name for logging
pub fn frame_name(frame: [u8; 2]) -> &'static str {
    match classify(frame) {
        FrameClass::ArcPower { .. } => ARC_POWER.name,
        FrameClass::Command { opcode, .. } => NORMAL[opcode as usize].name,
        FrameClass::Special { index, .. } => SPECIAL[index as usize].name,
        FrameClass::Extended { index, .. } => EXTENDED[index as usize].name,
        FrameClass::Ignored => "IGNORED",
    }
}

impl GearCtl {
    /// Dispatch the current message
    pub(crate) fn parse_command(&mut self, host: &mut dyn GearHost) -> ParseStatus {
        let mut status = ParseStatus::None;
        let mut executed: Option<&'static CommandEntry> = None;

        match classify(self.cur_message) {
            FrameClass::Special { index, .. } | FrameClass::Extended { index, .. } => {
                let extended = matches!(classify(self.cur_message), FrameClass::Extended { .. });
                if self.flags.dapc_sequence_running {
                    self.end_dapc_sequence();
                    host.stop_timer(TimerSlot::Message);
                }
                if self.flags.app_ext_requested {
                    // Only the command directly following ENABLE DEVICE TYPE is extended
                    self.flags.app_ext_requested = false;
                } else {
                    let entry = if extended {
                        &EXTENDED[index as usize]
                    } else {
                        &SPECIAL[index as usize]
                    };
                    let (run, st) = self.process_command_entry(entry);
                    status = st;
                    if run {
                        if extended
                            && index != WRITE_MEMORY_LOCATION
                            && index != WRITE_MEMORY_LOCATION_NO_REPLY
                        {
                            self.flags.write_memory_enabled = false;
                        }
                        executed = Some(entry);
                    }
                }
            }
            FrameClass::ArcPower { target, .. } => {
                if self.is_addressed(target) {
                    self.flags.write_memory_enabled = false;
                    executed = Some(&ARC_POWER);
                }
            }
            FrameClass::Command { target, opcode } => {
                if self.is_addressed(target) {
                    self.flags.write_memory_enabled = false;
                    if self.flags.dapc_sequence_running {
                        self.end_dapc_sequence();
                        host.stop_timer(TimerSlot::Message);
                    }
                    let entry = &NORMAL[opcode as usize];
                    if entry.device_type && !self.flags.app_ext_requested {
                        // Not enabled by ENABLE DEVICE TYPE
                    } else {
                        let (run, st) = self.process_command_entry(entry);
                        status = st;
                        if run {
                            self.flags.app_ext_requested = false;
                            if opcode <= NORMAL_INDIRECT_LEVEL_MAX {
                                self.status.power_failure = false;
                            }
                            executed = Some(entry);
                        }
                    }
                }
            }
            FrameClass::Ignored => {}
        }

        if let Some(entry) = executed {
            status = self.execute(host, entry, status);
        }
        // Every frame, addressed or not
        self.persist_level(host);

        if self.status.lamp_failure && self.physical_selection == PhysicalSelection::Requested {
            self.physical_selection = PhysicalSelection::Enabled;
        } else if !self.status.lamp_failure
            && self.physical_selection == PhysicalSelection::Enabled
        {
            self.physical_selection = PhysicalSelection::Requested;
        }
        self.flags.forced_message = false;
        status
    }

    /// Apply the repeat and window policy of an entry
    fn process_command_entry(&mut self, entry: &CommandEntry) -> (bool, ParseStatus) {
        if !entry.is_used() {
            return (false, ParseStatus::None);
        }
        let window_ok = !entry.init_window || self.flags.init_window_running;
        let repeat_open = self.flags.repeat_timer_requested;
        if entry.repeat && !repeat_open && !self.flags.forced_message {
            self.prev_message = self.cur_message;
            (false, ParseStatus::Request100msTimer)
        } else if entry.repeat && repeat_open {
            if self.prev_message == self.cur_message {
                (window_ok, ParseStatus::ClearAllTimers)
            } else {
                // Start over with this frame as the first one
                self.prev_message = self.cur_message;
                (false, ParseStatus::Request100msTimer)
            }
        } else if repeat_open {
            (false, ParseStatus::ClearAllTimers)
        } else {
            (window_ok, ParseStatus::None)
        }
    }

    fn execute(
        &mut self,
        host: &mut dyn GearHost,
        entry: &CommandEntry,
        mut status: ParseStatus,
    ) -> ParseStatus {
        debug!("Execute {}", entry.name);
        self.flags.response_requested = false;
        if let Some(handler) = entry.handler {
            handler(self, host);
        }

        if self.flags.reset_requested {
            self.factory_reset(host);
        } else {
            if entry.response == Response::Send
                || (entry.response == Response::Flag && self.flags.response_requested)
            {
                status = ParseStatus::SendResponse;
            }
            if self.flags.dapc_sequence_running {
                status = ParseStatus::Request200msTimer;
            }
        }

        status
    }

    fn persist_level(&mut self, host: &mut dyn GearHost) {
        if self.flags.output_change_requested {
            self.setup_fade();
            if self.requested_level != MASK {
                self.params.last_requested_level = self.requested_level;
                self.store_param(host, ParamId::LastRequestedLevel);
            }
            self.flags.output_change_requested = false;
        } else if self.params.last_requested_level != self.actual_level && self.fade_period == 0 {
            self.params.last_requested_level = self.actual_level;
            self.store_param(host, ParamId::LastRequestedLevel);
        }
    }

    pub(crate) fn end_dapc_sequence(&mut self) {
        self.flags.dapc_sequence_running = false;
        self.params.fade_time = self.saved_fade_time;
        self.fade_period = 0;
        self.status.fade_running = false;
    }

    fn factory_reset(&mut self, host: &mut dyn GearHost) {
        info!("Reset to factory defaults");
        self.set_off(host);
        host.reset_user_defaults();
        self.params = GearParams::load(|id| host.get_default_value(id));
        self.startup_condition(host);
        self.flags.reset_requested = false;
        self.status.power_failure = false;
    }
}
