//! Campaign and level picker
//!
//! Two pages: the campaign list, then the chosen campaign's levels in play
//! order. Locked levels are listed but cannot be picked. Back on the level
//! page returns to the campaign list.

use super::menu::{Menu, MenuItem, MenuResponse};
use crate::input_system::GameAction;
use crate::level::LevelRegistry;
use sdl2::render::Canvas;
use sdl2::video::Window;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampaignChoice {
    Play { campaign: String, level: String },
    Back,
}

#[derive(Debug, Clone, PartialEq)]
enum Page {
    Campaigns,
    Levels { campaign: String },
}

pub struct CampaignSelect {
    menu: Menu,
    page: Page,
    campaign_ids: Vec<String>,
    level_ids: Vec<String>,
}

impl CampaignSelect {
    pub fn new(registry: &LevelRegistry) -> Self {
        let mut select = CampaignSelect {
            menu: Menu::new("CAMPAIGNS", Vec::new()),
            page: Page::Campaigns,
            campaign_ids: Vec::new(),
            level_ids: Vec::new(),
        };
        select.show_campaigns(registry);
        select
    }

    /// Rebuilds the campaign page, e.g. after levels were unlocked
    pub fn show_campaigns(&mut self, registry: &LevelRegistry) {
        let campaigns = registry.list_campaigns();
        self.campaign_ids = campaigns.iter().map(|c| c.id.clone()).collect();
        let items = campaigns
            .iter()
            .map(|c| MenuItem::new(c.name.to_uppercase()))
            .collect();
        self.menu = Menu::new("CAMPAIGNS", items);
        self.menu.set_footer(Some("ESC TO GO BACK".to_string()));
        self.page = Page::Campaigns;
    }

    fn show_levels(&mut self, registry: &LevelRegistry, campaign: &str) {
        let levels = registry.get_campaign(campaign);
        self.level_ids = levels.iter().map(|l| l.id.clone()).collect();
        let items = levels
            .iter()
            .map(|l| {
                if l.unlocked {
                    MenuItem::new(l.name.to_uppercase())
                } else {
                    MenuItem::disabled(format!("{} (LOCKED)", l.name.to_uppercase()))
                }
            })
            .collect();
        let title = registry
            .campaign(campaign)
            .map(|c| c.name.to_uppercase())
            .unwrap_or_else(|| campaign.to_uppercase());
        self.menu = Menu::new(title, items);
        self.page = Page::Levels {
            campaign: campaign.to_string(),
        };
    }

    pub fn handle_action(&mut self, action: GameAction, registry: &LevelRegistry) -> Option<CampaignChoice> {
        let response = self.menu.handle_action(action);
        match (self.page.clone(), response) {
            (Page::Campaigns, MenuResponse::Confirmed(index)) => {
                let id = self.campaign_ids.get(index)?.clone();
                self.show_levels(registry, &id);
                None
            }
            (Page::Campaigns, MenuResponse::Back) => Some(CampaignChoice::Back),
            (Page::Levels { campaign }, MenuResponse::Confirmed(index)) => {
                let level = self.level_ids.get(index)?.clone();
                registry.is_unlocked(&level).then_some(CampaignChoice::Play { campaign, level })
            }
            (Page::Levels { .. }, MenuResponse::Back) => {
                self.show_campaigns(registry);
                None
            }
            _ => None,
        }
    }

    pub fn render(&self, canvas: &mut Canvas<Window>) -> Result<(), String> {
        self.menu.render(canvas)
    }
}
