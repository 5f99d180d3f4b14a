//! Card and spread tables.

use crate::{Card, Localized, Spread};

/// Height / width of a card face.
pub const CARD_ASPECT_RATIO: f32 = 1.618;

// ════════════════════════════════════════════════════════════════════════════
// Spreads
// ════════════════════════════════════════════════════════════════════════════

pub const SPREADS: &[Spread] = &[
    Spread {
        id:    "daily",
        name:  Localized::new("每日运势", "Daily Insight"),
        count: 1,
        slots: &[Localized::new("当前能量", "Current Energy")],
    },
    Spread {
        id:    "ppf",
        name:  Localized::new("过去/现在/未来", "Past, Present, Future"),
        count: 3,
        slots: &[
            Localized::new("过去", "Past"),
            Localized::new("现在", "Present"),
            Localized::new("未来", "Future"),
        ],
    },
    Spread {
        id:    "choice",
        name:  Localized::new("选择之径", "Decision Path"),
        count: 3,
        slots: &[
            Localized::new("现状", "Status Quo"),
            Localized::new("路径 A", "Path A"),
            Localized::new("路径 B", "Path B"),
        ],
    },
];

// ════════════════════════════════════════════════════════════════════════════
// Deck (major arcana subset)
// ════════════════════════════════════════════════════════════════════════════

pub const TAROT_DECK: &[Card] = &[
    Card {
        id:        "0",
        numeral:   "0",
        name:      Localized::new("愚者", "The Fool"),
        upright:   Localized::new("新的开始，天真，自发性。",
                                  "New beginnings, innocence, spontaneity."),
        reversed:  Localized::new("鲁莽，冒险，考虑不周。",
                                  "Recklessness, risk-taking, inconsideration."),
        image_url: "https://upload.wikimedia.org/wikipedia/commons/9/90/RWS_Tarot_00_Fool.jpg",
    },
    Card {
        id:        "1",
        numeral:   "I",
        name:      Localized::new("魔术师", "The Magician"),
        upright:   Localized::new("显化，足智多谋，力量。",
                                  "Manifestation, resourcefulness, power."),
        reversed:  Localized::new("操纵，计划不周，未开发的才能。",
                                  "Manipulation, poor planning, untapped talents."),
        image_url: "https://upload.wikimedia.org/wikipedia/commons/d/de/RWS_Tarot_01_Magician.jpg",
    },
    Card {
        id:        "2",
        numeral:   "II",
        name:      Localized::new("女祭司", "The High Priestess"),
        upright:   Localized::new("直觉，神圣知识，潜意识。",
                                  "Intuition, sacred knowledge, subconscious."),
        reversed:  Localized::new("秘密，与直觉断开，撤退。",
                                  "Secrets, disconnected from intuition, withdrawal."),
        image_url: "https://upload.wikimedia.org/wikipedia/commons/8/88/RWS_Tarot_02_High_Priestess.jpg",
    },
    Card {
        id:        "3",
        numeral:   "III",
        name:      Localized::new("皇后", "The Empress"),
        upright:   Localized::new("阴性特质，美，自然，丰饶。",
                                  "Femininity, beauty, nature, abundance."),
        reversed:  Localized::new("创造力阻塞，依赖他人。",
                                  "Creative block, dependence on others."),
        image_url: "https://upload.wikimedia.org/wikipedia/commons/a/af/RWS_Tarot_03_Empress.jpg",
    },
    Card {
        id:        "4",
        numeral:   "IV",
        name:      Localized::new("皇帝", "The Emperor"),
        upright:   Localized::new("权威，结构，坚实基础。",
                                  "Authority, structure, a solid foundation."),
        reversed:  Localized::new("统治，过度控制，缺乏纪律。",
                                  "Dominance, excessive control, lack of discipline."),
        image_url: "https://upload.wikimedia.org/wikipedia/commons/c/c3/RWS_Tarot_04_Emperor.jpg",
    },
    Card {
        id:        "5",
        numeral:   "V",
        name:      Localized::new("教皇", "The Hierophant"),
        upright:   Localized::new("精神智慧，宗教信仰，遵从。",
                                  "Spiritual wisdom, religious beliefs, conformity."),
        reversed:  Localized::new("个人信仰，自由，挑战现状。",
                                  "Personal beliefs, freedom, challenging the status quo."),
        image_url: "https://upload.wikimedia.org/wikipedia/commons/8/8d/RWS_Tarot_05_Hierophant.jpg",
    },
    Card {
        id:        "10",
        numeral:   "X",
        name:      Localized::new("命运之轮", "Wheel of Fortune"),
        upright:   Localized::new("好运，因果，生命周期，命运。",
                                  "Good luck, karma, life cycles, destiny."),
        reversed:  Localized::new("坏运，抗拒改变，打破循环。",
                                  "Bad luck, resistance to change, breaking cycles."),
        image_url: "https://upload.wikimedia.org/wikipedia/commons/3/3c/RWS_Tarot_10_Wheel_of_Fortune.jpg",
    },
    Card {
        id:        "13",
        numeral:   "XIII",
        name:      Localized::new("死神", "Death"),
        upright:   Localized::new("结束，变化，转型，过渡。",
                                  "Endings, change, transformation, transition."),
        reversed:  Localized::new("抗拒改变，个人转型。",
                                  "Resistance to change, personal transformation."),
        image_url: "https://upload.wikimedia.org/wikipedia/commons/d/d7/RWS_Tarot_13_Death.jpg",
    },
    Card {
        id:        "19",
        numeral:   "XIX",
        name:      Localized::new("太阳", "The Sun"),
        upright:   Localized::new("积极，乐趣，温暖，成功。",
                                  "Positivity, fun, warmth, success, vitality."),
        reversed:  Localized::new("内在小孩，感到沮丧，过度乐观。",
                                  "Inner child, feeling down, overly optimistic."),
        image_url: "https://upload.wikimedia.org/wikipedia/commons/1/17/RWS_Tarot_19_Sun.jpg",
    },
    Card {
        id:        "21",
        numeral:   "XXI",
        name:      Localized::new("世界", "The World"),
        upright:   Localized::new("完成，整合，成就，旅行。",
                                  "Completion, integration, accomplishment, travel."),
        reversed:  Localized::new("寻求结束，捷径，延误。",
                                  "Seeking closure, short-cuts, delays."),
        image_url: "https://upload.wikimedia.org/wikipedia/commons/f/ff/RWS_Tarot_21_World.jpg",
    },
];
