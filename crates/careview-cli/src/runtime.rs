// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use careview_app::{BasicsSummary, Invitation, InvitationId, PersonId, PersonRecord, TabKind};
use careview_store::Store;

pub struct StoreRuntime<'a> {
    store: &'a Store,
    config_show_names: bool,
}

impl<'a> StoreRuntime<'a> {
    pub fn new(store: &'a Store, config_show_names: bool) -> Self {
        Self {
            store,
            config_show_names,
        }
    }
}

impl careview_tui::AppRuntime for StoreRuntime<'_> {
    fn load_people(&mut self) -> Result<Vec<PersonRecord>> {
        self.store.list_people()
    }

    fn load_invitations(&mut self) -> Result<Vec<Invitation>> {
        self.store.list_invitations()
    }

    fn accept_invitation(&mut self, invitation_id: InvitationId) -> Result<PersonId> {
        self.store.accept_invitation(invitation_id)
    }

    fn dismiss_invitation(&mut self, invitation_id: InvitationId) -> Result<()> {
        self.store.dismiss_invitation(invitation_id)
    }

    fn load_basics(&mut self, person_id: PersonId) -> Result<BasicsSummary> {
        let events = self.store.list_device_events(person_id)?;
        Ok(BasicsSummary::from_events(&events))
    }

    fn show_names_default(&mut self) -> Result<Option<bool>> {
        let stored = self.store.get_show_names_override()?;
        Ok(Some(stored.unwrap_or(self.config_show_names)))
    }

    fn set_show_names_default(&mut self, show: bool) -> Result<()> {
        self.store.put_show_names(show)
    }

    fn set_start_tab_default(&mut self, tab: TabKind) -> Result<()> {
        self.store.put_start_tab(tab)
    }
}
