//! Localized UI text.

use crate::Locale;

/// Every user-facing string outside the card tables.
#[derive(Debug)]
pub struct UiStrings {
    pub title:                &'static str,
    pub subtitle:             &'static str,
    pub intent:               &'static str,
    pub question_label:       &'static str,
    pub question_placeholder: &'static str,
    pub choose_spread:        &'static str,
    pub commence:             &'static str,
    pub question_required:    &'static str,
    pub gesture_title:        &'static str,
    pub gesture_open:         &'static str,
    pub gesture_pinch:        &'static str,
    pub gesture_fist:         &'static str,
    pub got_it:               &'static str,
    pub consulting:           &'static str,
    pub restart:              &'static str,
    pub spiritual_insight:    &'static str,
    pub upright:              &'static str,
    pub reversed:             &'static str,
    pub mouse_mode:           &'static str,
    pub hand_mode:            &'static str,
    pub missing_key_title:    &'static str,
    pub missing_key_hint:     &'static str,
}

const ZH: UiStrings = UiStrings {
    title:                "虚幻塔罗",
    subtitle:             "连接未知，用你的双手触碰虚空，开启命运的指示。",
    intent:               "明确你的意图",
    question_label:       "你的问题",
    question_placeholder: "宇宙今天需要告诉我什么？",
    choose_spread:        "选择牌阵",
    commence:             "开始抽牌",
    question_required:    "请输入你的问题。",
    gesture_title:        "启示三步曲",
    gesture_open:         "张开手掌: 触碰虚空 (悬停)",
    gesture_pinch:        "指尖捏合: 抓住命运 (抓取)",
    gesture_fist:         "紧握拳头: 见证真言 (确认)",
    got_it:               "领悟",
    consulting:           "正在请示神谕...",
    restart:              "返回起点",
    spiritual_insight:    "灵性洞察",
    upright:              "正位",
    reversed:             "逆位",
    mouse_mode:           "鼠标模式",
    hand_mode:            "手势模式",
    missing_key_title:    "未配置神谕密钥",
    missing_key_hint:     "为了获得 AI 解读，请设置 GEMINI_API_KEY 或在配置文件中填写 api_key。",
};

const EN: UiStrings = UiStrings {
    title:                "ETHEREAL TAROT",
    subtitle:             "Connect with the unseen. Use your hands to reach into the digital ether and pull forth your destiny.",
    intent:               "State Your Intent",
    question_label:       "Your Question",
    question_placeholder: "What does the universe need to tell me today?",
    choose_spread:        "Choose Spread",
    commence:             "Commence Draw",
    question_required:    "Please enter your question.",
    gesture_title:        "The Three Steps",
    gesture_open:         "Open Palm: Reach (Hover)",
    gesture_pinch:        "Pinch: Seize (Grab)",
    gesture_fist:         "Fist: Reveal (Confirm)",
    got_it:               "I Understand",
    consulting:           "Consulting the Oracle...",
    restart:              "Return to Origin",
    spiritual_insight:    "The Spiritual Insight",
    upright:              "Upright",
    reversed:             "Reversed",
    mouse_mode:           "Mouse Mode",
    hand_mode:            "Gesture Mode",
    missing_key_title:    "No Oracle Key Configured",
    missing_key_hint:     "To receive AI interpretations, set GEMINI_API_KEY or add api_key to the config file.",
};

/// String table for `locale`.
pub fn ui(locale: Locale) -> &'static UiStrings {
    match locale {
        Locale::Zh => &ZH,
        Locale::En => &EN,
    }
}
