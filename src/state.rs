#[derive(Debug, Default, Clone, Copy)]
pub struct EngineState {
    running: bool,
    click_through: bool,
    click_through_dirty: bool,
    filters_enabled: bool,
    filters_dirty: bool,
}

impl EngineState {
    pub fn new() -> Self {
        Self {
            running: false,
            click_through: true,
            click_through_dirty: false,
            filters_enabled: true,
            filters_dirty: false,
        }
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn click_through(&self) -> bool {
        self.click_through
    }

    pub fn set_click_through(&mut self, enabled: bool) {
        if self.click_through == enabled {
            return;
        }
        self.click_through = enabled;
        self.click_through_dirty = true;
    }

    pub fn take_click_through_change(&mut self) -> Option<bool> {
        if self.click_through_dirty {
            self.click_through_dirty = false;
            Some(self.click_through)
        } else {
            None
        }
    }

    pub fn filters_enabled(&self) -> bool {
        self.filters_enabled
    }

    pub fn set_filters_enabled(&mut self, enabled: bool) {
        if self.filters_enabled == enabled {
            return;
        }
        self.filters_enabled = enabled;
        self.filters_dirty = true;
    }

    pub fn take_filters_change(&mut self) -> Option<bool> {
        if self.filters_dirty {
            self.filters_dirty = false;
            Some(self.filters_enabled)
        } else {
            None
        }
    }
}
