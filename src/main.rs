use log::{debug, error, info, warn};
use sdl2::image::LoadTexture;
use sdl2::render::{Canvas, Texture};
use sdl2::video::Window;
use std::time::Instant;

mod bullet;
mod collision;
mod config;
mod enemy;
mod entity;
mod error;
mod events;
mod game;
mod gui;
mod hazard;
mod input_system;
mod item;
mod level;
mod player;
mod progression;
mod render;
mod save;
mod scene;
mod session;
mod spawn;
mod stats;
mod text;
mod ui;

use config::{GameSettings, CAMPAIGNS_PATH, CAPTION, ENEMIES_PATH, ITEMS_PATH, PLAYER_CONFIG_PATH, SETTINGS_PATH};
use error::GameError;
use game::{FixedTimestep, GameWorld, Outcome};
use glam::Vec2;
use gui::{
    CampaignChoice, CampaignSelect, GameOverChoice, GameOverScreen, MainMenu, MainMenuChoice, PauseChoice,
    PauseMenu, RunSummary, SettingsMenu,
};
use input_system::{GameAction, InputContext, InputSystem, PlayerInput};
use item::ItemManager;
use level::{LevelManager, LevelRegistry};
use player::PlayerConfig;
use save::{default_save_dir, Profile, SaveManager};
use scene::{SceneId, SceneManager};
use session::SessionStats;
use spawn::EntityRegistry;
use ui::{BuffDisplay, FloatingText, Hud, HudSnapshot};

const BACKGROUND_PATH: &str = "assets/images/background.png";
const FADE_DURATION: f32 = 0.5;

/// The world currently being played and where it came from
struct Run {
    world: GameWorld,
    level_id: String,
    campaign: Option<String>,
    /// High score before this run, for the new-high-score banner
    previous_high: u32,
    finished: bool,
}

/// Loaded data plus every screen, driven by the scene manager
struct App {
    settings: GameSettings,
    player_config: PlayerConfig,
    entity_registry: EntityRegistry,
    registry: LevelRegistry,
    saves: Option<SaveManager>,
    profile: Profile,

    scenes: SceneManager,
    input: InputSystem,
    main_menu: MainMenu,
    campaign_select: CampaignSelect,
    settings_menu: Option<SettingsMenu>,
    pause_menu: PauseMenu,
    game_over: GameOverScreen,
    hud: Hud,
    buffs: BuffDisplay,
    floating_text: FloatingText,

    run: Option<Run>,
    show_hitboxes: bool,
    time: f32,
    quit: bool,
}

impl App {
    fn new(settings: GameSettings) -> Result<Self, GameError> {
        let player_config = PlayerConfig::load_or_default(PLAYER_CONFIG_PATH);

        let mut entity_registry = EntityRegistry::with_defaults();
        if let Err(e) = entity_registry.load_enemy_defaults(ENEMIES_PATH) {
            warn!("No enemy defaults loaded from {}: {}", ENEMIES_PATH, e);
        }

        let mut registry = LevelRegistry::load(CAMPAIGNS_PATH)?;

        let saves = match SaveManager::new(default_save_dir()) {
            Ok(saves) => Some(saves),
            Err(e) => {
                warn!("Saving disabled: {}", e);
                None
            }
        };
        let profile = saves
            .as_ref()
            .map(SaveManager::load_or_recover)
            .unwrap_or_default();
        for id in &profile.unlocked_levels {
            registry.unlock(id);
        }

        let mut main_menu = MainMenu::new();
        main_menu.set_high_score(profile.high_score);
        let campaign_select = CampaignSelect::new(&registry);

        let mut scenes = SceneManager::with_all_scenes();
        scenes.set_scene(SceneId::MainMenu)?;

        Ok(App {
            show_hitboxes: settings.debug_hitboxes,
            settings,
            player_config,
            entity_registry,
            registry,
            saves,
            profile,
            scenes,
            input: InputSystem::new(),
            main_menu,
            campaign_select,
            settings_menu: None,
            pause_menu: PauseMenu::new(),
            game_over: GameOverScreen::new(),
            hud: Hud::new(),
            buffs: BuffDisplay::new(),
            floating_text: FloatingText::new(),
            run: None,
            time: 0.0,
            quit: false,
        })
    }

    fn screen(&self) -> Vec2 {
        Vec2::new(self.settings.screen_width as f32, self.settings.screen_height as f32)
    }

    /// Items are reloaded per run so each world owns its loot table
    fn load_items() -> ItemManager {
        ItemManager::load(ITEMS_PATH).unwrap_or_else(|e| {
            warn!("No items loaded from {}: {}", ITEMS_PATH, e);
            ItemManager::empty()
        })
    }

    fn start_level(&mut self, level_id: &str, campaign: Option<String>) -> Result<(), GameError> {
        let level = self
            .registry
            .get(level_id)
            .ok_or_else(|| GameError::UnknownLevel(level_id.to_string()))?;
        let manager = LevelManager::load(self.registry.resolve_path(level))?;
        info!("Starting level {} ({})", level.name, level.id);

        let mut world = GameWorld::new(
            self.screen(),
            self.player_config.clone(),
            manager,
            Self::load_items(),
            self.settings.start_lives,
        )
        .with_entity_registry(self.entity_registry.clone());
        world.stats = SessionStats::with_high_score(self.profile.high_score);

        if campaign.is_some() {
            self.profile.last_campaign = campaign.clone();
        }
        self.run = Some(Run {
            world,
            level_id: level_id.to_string(),
            campaign,
            previous_high: self.profile.high_score,
            finished: false,
        });
        self.floating_text.clear();
        self.game_over.reset();
        self.scenes.set_scene_with_fade(SceneId::Game, FADE_DURATION)?;
        Ok(())
    }

    /// Start from the main menu: last campaign, else the default one
    fn start_default(&mut self) -> Result<(), GameError> {
        let campaign = self
            .profile
            .last_campaign
            .clone()
            .filter(|c| self.registry.campaign(c).is_some())
            .or_else(|| self.registry.default_campaign().map(str::to_string))
            .or_else(|| self.registry.list_campaigns().first().map(|c| c.id.clone()))
            .ok_or_else(|| GameError::Config("no campaigns defined".to_string()))?;
        let level = self
            .registry
            .default_start(&campaign)
            .map(|l| l.id.clone())
            .ok_or_else(|| GameError::UnknownLevel(format!("start of campaign {}", campaign)))?;
        self.start_level(&level, Some(campaign))
    }

    fn save_profile(&mut self) {
        let Some(saves) = &self.saves else {
            return;
        };
        if let Err(e) = saves.save_profile(&mut self.profile) {
            error!("Failed to save profile: {}", e);
        }
    }

    /// Folds the run into the profile, unlocks the next level on victory and saves
    fn finish_run(&mut self, victory: bool) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        if run.finished {
            return;
        }
        run.finished = true;

        self.profile.record_run(&run.world.stats);
        let mut has_next = false;
        if victory {
            if let Some(next) = self.registry.next_level(&run.level_id).map(|l| l.id.clone()) {
                has_next = true;
                self.registry.unlock(&next);
            }
        }
        self.profile.merge_unlocked(self.registry.unlocked_ids());

        let summary = RunSummary::from_stats(&run.world.stats, victory, run.previous_high);
        self.game_over.trigger(summary, has_next);
        self.main_menu.set_high_score(self.profile.high_score);
        self.campaign_select.show_campaigns(&self.registry);
        self.save_profile();
    }

    fn input_context(&self) -> InputContext {
        match self.scenes.current() {
            Some(SceneId::Game) if self.game_over.is_active() => InputContext::GameOver,
            Some(SceneId::Game) => InputContext::Playing,
            Some(SceneId::Pause) => InputContext::Paused,
            _ => InputContext::Menu,
        }
    }

    fn handle_action(&mut self, action: GameAction) -> Result<(), GameError> {
        if action == GameAction::Quit {
            self.quit = true;
            return Ok(());
        }
        if action == GameAction::ToggleHitboxes {
            self.show_hitboxes = !self.show_hitboxes;
            debug!("Hitboxes {}", if self.show_hitboxes { "on" } else { "off" });
            return Ok(());
        }
        if self.scenes.is_transitioning() {
            return Ok(());
        }

        match self.scenes.current() {
            Some(SceneId::MainMenu) => match self.main_menu.handle_action(action) {
                Some(MainMenuChoice::Start) => self.start_default()?,
                Some(MainMenuChoice::Campaigns) => {
                    self.campaign_select.show_campaigns(&self.registry);
                    self.scenes.set_scene_with_fade(SceneId::CampaignSelect, FADE_DURATION)?;
                }
                Some(MainMenuChoice::Settings) => {
                    self.settings_menu = Some(SettingsMenu::new(self.settings.clone()));
                    self.scenes.set_scene(SceneId::Settings)?;
                }
                Some(MainMenuChoice::Quit) => self.quit = true,
                None => {}
            },
            Some(SceneId::CampaignSelect) => {
                match self.campaign_select.handle_action(action, &self.registry) {
                    Some(CampaignChoice::Play { campaign, level }) => self.start_level(&level, Some(campaign))?,
                    Some(CampaignChoice::Back) => {
                        self.scenes.set_scene_with_fade(SceneId::MainMenu, FADE_DURATION)?;
                    }
                    None => {}
                }
            }
            Some(SceneId::Settings) => {
                let closed = self
                    .settings_menu
                    .as_mut()
                    .is_none_or(|menu| menu.handle_action(action));
                if closed {
                    if let Some(menu) = self.settings_menu.take() {
                        self.settings = menu.settings().clone();
                        self.show_hitboxes = self.settings.debug_hitboxes;
                        if let Err(e) = self.settings.save(SETTINGS_PATH) {
                            warn!("Failed to save settings: {}", e);
                        }
                    }
                    self.scenes.set_scene(SceneId::MainMenu)?;
                }
            }
            Some(SceneId::Game) => self.handle_game_action(action)?,
            Some(SceneId::Pause) => match self.pause_menu.handle_action(action) {
                Some(PauseChoice::Resume) => {
                    self.scenes.pop_scene();
                    if let Some(run) = self.run.as_mut() {
                        run.world.state.paused = false;
                    }
                }
                Some(PauseChoice::MainMenu) => {
                    self.abandon_run();
                    self.scenes.set_scene_with_fade(SceneId::MainMenu, FADE_DURATION)?;
                }
                None => {}
            },
            None => {}
        }
        Ok(())
    }

    fn handle_game_action(&mut self, action: GameAction) -> Result<(), GameError> {
        if self.game_over.is_active() {
            let Some(choice) = self.game_over.handle_action(action) else {
                return Ok(());
            };
            let Some(mut run) = self.run.take() else {
                return Ok(());
            };
            match choice {
                GameOverChoice::Continue => match self.registry.next_level(&run.level_id).map(|l| l.id.clone()) {
                    Some(next) => self.start_level(&next, run.campaign)?,
                    None => {
                        self.scenes.set_scene_with_fade(SceneId::MainMenu, FADE_DURATION)?;
                    }
                },
                GameOverChoice::Retry => {
                    info!("Retrying level {}", run.level_id);
                    run.world.reset();
                    run.previous_high = self.profile.high_score;
                    run.finished = false;
                    self.run = Some(run);
                    self.floating_text.clear();
                    self.game_over.reset();
                    self.scenes.set_scene_with_fade(SceneId::Game, FADE_DURATION)?;
                }
                GameOverChoice::MainMenu => {
                    self.game_over.reset();
                    self.scenes.set_scene_with_fade(SceneId::MainMenu, FADE_DURATION)?;
                }
            }
            return Ok(());
        }

        if action == GameAction::Pause {
            if let Some(run) = self.run.as_mut() {
                run.world.state.paused = true;
            }
            self.pause_menu = PauseMenu::new();
            self.scenes.push_scene(SceneId::Pause)?;
        }
        Ok(())
    }

    /// Leaving mid-run still counts the score toward the profile
    fn abandon_run(&mut self) {
        if let Some(run) = self.run.take() {
            if !run.finished {
                self.profile.record_run(&run.world.stats);
                self.main_menu.set_high_score(self.profile.high_score);
                self.save_profile();
            }
        }
    }

    /// One fixed tick
    fn update(&mut self, dt: f32, input: &PlayerInput) {
        self.time += dt;
        self.scenes.update(dt);
        self.game_over.update(dt);
        self.floating_text.update(dt);

        if self.scenes.current() != Some(SceneId::Game) || self.scenes.is_transitioning() {
            return;
        }
        let Some(run) = self.run.as_mut() else {
            return;
        };
        let outcome = run.world.update(dt, input);
        for popup in run.world.take_popups() {
            self.floating_text.push_score(&popup);
        }
        match outcome {
            Outcome::GameOver => self.finish_run(false),
            Outcome::Victory => self.finish_run(true),
            Outcome::LifeLost | Outcome::Running => {}
        }
    }

    fn render(&self, canvas: &mut Canvas<Window>, background: Option<&Texture>) -> Result<(), String> {
        render::render_background(canvas, background, self.time)?;

        // The Game scene stays visible under the pause overlay
        let in_game = matches!(self.scenes.current(), Some(SceneId::Game | SceneId::Pause));
        if in_game {
            if let Some(run) = &self.run {
                render::render_world(canvas, &run.world, self.show_hitboxes)?;
                self.floating_text.render(canvas)?;
                self.hud.render(canvas, &HudSnapshot::from_world(&run.world))?;
                self.buffs.render(canvas, &run.world.player.stats)?;
            }
        }

        match self.scenes.current() {
            Some(SceneId::MainMenu) => self.main_menu.render(canvas)?,
            Some(SceneId::CampaignSelect) => self.campaign_select.render(canvas)?,
            Some(SceneId::Settings) => {
                if let Some(menu) = &self.settings_menu {
                    menu.render(canvas)?;
                }
            }
            Some(SceneId::Pause) => self.pause_menu.render(canvas)?,
            Some(SceneId::Game) => self.game_over.render(canvas)?,
            None => {}
        }

        render::render_fade(canvas, self.scenes.transition_alpha())
    }
}

fn load_background<'a>(
    texture_creator: &'a sdl2::render::TextureCreator<sdl2::video::WindowContext>,
) -> Option<Texture<'a>> {
    match texture_creator.load_texture(BACKGROUND_PATH) {
        Ok(texture) => Some(texture),
        Err(e) => {
            debug!("No background image ({}), using the star field", e);
            None
        }
    }
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = GameSettings::load_or_default(SETTINGS_PATH);

    let sdl_context = sdl2::init()?;
    let video_subsystem = sdl_context.video()?;
    let _image_context = sdl2::image::init(sdl2::image::InitFlag::PNG)?;

    let window = video_subsystem
        .window(CAPTION, settings.screen_width, settings.screen_height)
        .position_centered()
        .build()
        .map_err(|e| e.to_string())?;
    let mut canvas = window
        .into_canvas()
        .accelerated()
        .present_vsync()
        .build()
        .map_err(|e| e.to_string())?;
    canvas
        .set_logical_size(settings.screen_width, settings.screen_height)
        .map_err(|e| e.to_string())?;

    let texture_creator = canvas.texture_creator();
    let background = load_background(&texture_creator);
    let mut event_pump = sdl_context.event_pump()?;

    let mut app = App::new(settings).map_err(|e| e.to_string())?;
    let mut timestep = FixedTimestep::default();
    let mut last_frame = Instant::now();

    info!("Controls: WASD/arrows move, Space/Z fire, hold X for spread, Esc/P pause, F1/B hitboxes");

    while !app.quit {
        app.input.set_context(app.input_context());
        for action in app.input.poll_events(&mut event_pump) {
            if let Err(e) = app.handle_action(action) {
                error!("{}", e);
            }
        }

        let now = Instant::now();
        let frame_time = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        let input = PlayerInput::from_event_pump(&event_pump);
        for _ in 0..timestep.advance(frame_time) {
            app.update(timestep.step(), &input);
        }

        app.render(&mut canvas, background.as_ref())?;
        canvas.present();
    }

    app.abandon_run();
    info!("Goodbye");
    Ok(())
}
