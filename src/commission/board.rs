use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::format::parse_commission;
use super::merchant::{MerchantCommission, TIER_CODES};
use super::validator::{validate_cascade, validate_terminal, CascadeCheck, CommissionError};
use crate::api::{CommissionApi, CommissionEdit, EditData, MenuApi, MenuCounts};
use crate::error::ConsoleError;
use crate::listing::{ListQuery, Pagination, SearchParams};
use crate::notify::{Notice, Notifier};
use crate::session::{Page, Session};

const USER_AGENT: &str = concat!("paynet-admin/", env!("CARGO_PKG_VERSION"));

/// Save button state for one merchant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Idle,
    Saving,
    /// Shown until `until`, then reads as `Idle`
    Saved { until: Instant },
}

impl SaveState {
    pub fn at(self, now: Instant) -> SaveState {
        match self {
            SaveState::Saved { until } if now >= until => SaveState::Idle,
            other => other,
        }
    }
}

/// Editable copy of one merchant's inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommissionDraft {
    pub tiers: Vec<Decimal>,
    pub terminal: Decimal,
}

impl From<&MerchantCommission> for CommissionDraft {
    fn from(merchant: &MerchantCommission) -> Self {
        Self { tiers: merchant.tier_values(), terminal: merchant.merchant_commission }
    }
}

/// The store commission table: one page of merchants, their drafts and save states
pub struct CommissionBoard<A> {
    api: A,
    session: Session,
    notifier: Arc<dyn Notifier>,
    merchants: Vec<MerchantCommission>,
    drafts: HashMap<String, CommissionDraft>,
    save_states: HashMap<String, SaveState>,
    query: ListQuery,
    pagination: Pagination,
    saved_indicator: Duration,
    menu: Option<MenuCounts>,
}

impl<A: CommissionApi + MenuApi> CommissionBoard<A> {
    pub fn new(api: A, session: Session, notifier: Arc<dyn Notifier>, page_size: u32, saved_indicator: Duration) -> Self {
        Self {
            api,
            session,
            notifier,
            merchants: Vec::new(),
            drafts: HashMap::new(),
            save_states: HashMap::new(),
            query: ListQuery::new(1, page_size, SearchParams::new("")),
            pagination: Pagination::new(page_size),
            saved_indicator,
            menu: None,
        }
    }

    pub fn merchants(&self) -> &[MerchantCommission] {
        &self.merchants
    }

    pub fn merchant(&self, id: &str) -> Option<&MerchantCommission> {
        self.merchants.iter().find(|m| m.id == id)
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn menu(&self) -> Option<&MenuCounts> {
        self.menu.as_ref()
    }

    pub fn draft(&self, id: &str) -> Option<&CommissionDraft> {
        self.drafts.get(id)
    }

    pub fn save_state(&self, id: &str) -> SaveState {
        self.save_states
            .get(id)
            .copied()
            .unwrap_or(SaveState::Idle)
            .at(Instant::now())
    }

    pub async fn load(&mut self, page: u32, search: SearchParams) -> Result<(), ConsoleError> {
        self.query.page = page.max(1);
        self.query.search = search;
        self.reload().await
    }

    /// Re-fetches the current page; drafts are reset to the server's values
    pub async fn reload(&mut self) -> Result<(), ConsoleError> {
        self.authorize()?;
        let page = match self.api.list_commissions(&self.session, &self.query).await {
            Ok(page) => page,
            Err(e) => {
                self.notifier
                    .notify(Notice::error(format!("Could not load commission data: {}", e.user_message())));
                return Err(e);
            }
        };

        self.pagination.current_page = self.query.page;
        self.pagination.set_total(page.total_count);
        self.merchants = page.items.into_iter().map(MerchantCommission::from_row).collect();
        self.drafts = self
            .merchants
            .iter()
            .map(|m| (m.id.clone(), CommissionDraft::from(m)))
            .collect();
        Ok(())
    }

    /// Stores one tier input and returns the parsed value
    pub fn set_tier_input(&mut self, id: &str, index: usize, input: &str) -> Result<Decimal, ConsoleError> {
        let draft = self.draft_mut(id)?;
        let count = draft.tiers.len();
        let slot = draft.tiers.get_mut(index).ok_or_else(|| CommissionError::UnknownTier {
            merchant: id.to_string(),
            index,
            count,
        })?;
        *slot = parse_commission(input);
        Ok(*slot)
    }

    pub fn set_terminal_input(&mut self, id: &str, input: &str) -> Result<Decimal, ConsoleError> {
        let draft = self.draft_mut(id)?;
        draft.terminal = parse_commission(input);
        Ok(draft.terminal)
    }

    /// Live check of the current draft against the merchant total
    pub fn check(&self, id: &str) -> Result<CascadeCheck, ConsoleError> {
        let merchant = self.merchant(id).ok_or_else(|| CommissionError::UnknownMerchant(id.to_string()))?;
        let tiers = self
            .drafts
            .get(id)
            .map(|d| d.tiers.clone())
            .unwrap_or_else(|| merchant.tier_values());
        Ok(validate_cascade(&tiers, merchant.total_commission))
    }

    /// Validates the draft and submits it.
    ///
    /// The saved indicator starts only once the server accepts the edit; a
    /// rejection puts the button back to idle and surfaces the message.
    pub async fn save(&mut self, id: &str) -> Result<(), ConsoleError> {
        self.authorize()?;
        let (total, floor, draft) = match self.prepare_save(id) {
            Ok(prepared) => prepared,
            Err(e) => {
                self.notifier.notify(Notice::error(e.to_string()));
                return Err(e.into());
            }
        };

        let check = validate_cascade(&draft.tiers, total);
        if let Err(e) = check
            .ensure_saveable()
            .and_then(|_| validate_terminal(draft.terminal, check.sum, floor))
        {
            self.notifier.notify(Notice::error(e.to_string()));
            return Err(e.into());
        }

        self.save_states.insert(id.to_string(), SaveState::Saving);

        let edit_data = EditData {
            ip: self.api.client_ip().await,
            browser: USER_AGENT.to_string(),
            url: self.api.edit_url(id),
        };
        let result = match CommissionEdit::new(&self.session, id, &TIER_CODES, &draft.tiers, draft.terminal, edit_data) {
            Ok(edit) => self.api.edit_commission(id, &edit).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(message) => {
                let until = Instant::now() + self.saved_indicator;
                self.save_states.insert(id.to_string(), SaveState::Saved { until });
                self.apply_saved(id, &draft);
                tracing::info!("commission for merchant {} saved", id);
                self.notifier
                    .notify(Notice::info(message.unwrap_or_else(|| "Commission updated".to_string())));

                self.refresh_menu().await;
                if let Err(e) = self.reload().await {
                    tracing::warn!("commission table refresh after save failed: {}", e);
                }
                Ok(())
            }
            Err(e) => {
                self.save_states.insert(id.to_string(), SaveState::Idle);
                self.notifier.notify(Notice::error(e.user_message()));
                Err(e)
            }
        }
    }

    pub async fn refresh_menu(&mut self) {
        match self.api.load_menu(&self.session).await {
            Ok(counts) => self.menu = Some(counts),
            Err(e) => tracing::warn!("menu count refresh failed: {}", e),
        }
    }

    fn authorize(&self) -> Result<(), ConsoleError> {
        self.session.require_access(Page::StoreCommission).map_err(|e| {
            self.notifier.notify(Notice::error(e.user_message()));
            e
        })
    }

    fn prepare_save(&self, id: &str) -> Result<(Decimal, Option<Decimal>, CommissionDraft), CommissionError> {
        let merchant = self
            .merchant(id)
            .ok_or_else(|| CommissionError::UnknownMerchant(id.to_string()))?;
        if !merchant.is_active() {
            return Err(CommissionError::InactiveMerchant(merchant.name.clone()));
        }

        let draft = self
            .drafts
            .get(id)
            .cloned()
            .unwrap_or_else(|| CommissionDraft::from(merchant));
        Ok((merchant.total_commission, merchant.settlement_floor, draft))
    }

    fn draft_mut(&mut self, id: &str) -> Result<&mut CommissionDraft, ConsoleError> {
        if !self.merchants.iter().any(|m| m.id == id) {
            return Err(CommissionError::UnknownMerchant(id.to_string()).into());
        }
        let merchants = &self.merchants;
        Ok(self.drafts.entry(id.to_string()).or_insert_with(|| {
            merchants
                .iter()
                .find(|m| m.id == id)
                .map(CommissionDraft::from)
                .unwrap_or(CommissionDraft { tiers: Vec::new(), terminal: Decimal::ZERO })
        }))
    }

    fn apply_saved(&mut self, id: &str, draft: &CommissionDraft) {
        let Some(merchant) = self.merchants.iter_mut().find(|m| m.id == id) else {
            return;
        };
        for (tier, value) in merchant.tiers.iter_mut().zip(&draft.tiers) {
            tier.commission = *value;
        }
        merchant.merchant_commission = draft.terminal;
        merchant.has_commission =
            !draft.terminal.is_zero() || draft.tiers.iter().any(|v| *v > Decimal::ZERO);
        merchant.last_updated = Some(chrono::Local::now().format("%Y-%m-%d").to_string());
    }
}
