pub const REGISTER_URL: &str = "/user/register";
pub const LOGIN_URL: &str = "/user/login";
pub const LOGOUT_URL: &str = "/user/logout";
pub const TOP_PLAYERS_URL: &str = "/user/top";
pub const PROFILE_URL: &str = "/user/{username}";
pub const ACCOUNT_URL: &str = "/account";
pub const CHANGE_USERNAME_URL: &str = "/account/username";
pub const CHANGE_PASSWORD_URL: &str = "/account/password";
pub const CHANGE_PICTURE_URL: &str = "/account/picture";
pub const CATEGORIES_URL: &str = "/categories";
pub const CATEGORY_QUESTION_URL: &str = "/categories/question";
pub const CREATE_QUIZ_URL: &str = "/quiz/create";
pub const QUIZ_URL: &str = "/quiz/{quiz_id}";
pub const VERIFY_ANSWER_URL: &str = "/quiz/verifyAnswer";
pub const CHEAT_SHEET_URL: &str = "/cheatsheet";
pub const GACHA_PULL_URL: &str = "/gacha/pull";

// Quiz sessions
pub const DEFAULT_QUESTIONS_PER_QUIZ: usize = 10;

// Reward ledger
pub const BASE_COINS: i64 = 100;
pub const COINS_PER_CORRECT: i64 = 10;
pub const BASE_EXPERIENCE: i64 = 10;

// Gacha
pub const SINGLE_PULL_PRICE: i64 = 100;
pub const MULTI_PULL_SIZE: u32 = 10;
pub const MULTI_PULL_PRICE: i64 = 900;
pub const MAX_PULL_QUANTITY: u32 = MULTI_PULL_SIZE;
pub const LEGENDARY_THRESHOLD: f64 = 0.05;
pub const RARE_THRESHOLD: f64 = 0.20;

// Accounts
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const TOP_PLAYERS_LIMIT: u32 = 5;
pub const PROFILE_PICTURES: &[&str] = &[
    "aventurine",
    "blade",
    "boothill",
    "dan_heng",
    "feixiao",
    "firefly",
    "jing_yuan",
    "jingliu",
    "kafka",
    "robin",
    "ruan_mei",
    "silver_wolf",
    "sparkle",
    "sunday",
    "the_herta",
];

pub fn profile_picture_path(name: &str) -> String {
    format!("/assets/profiles/{name}.png")
}
