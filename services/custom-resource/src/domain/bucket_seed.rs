//! メインバケットに投入する静的データ
//!
//! ゲームが起動時に読む固定のCSVとハイスコアの初期値。

use super::stack_arn::StackArn;

/// バケットに置く1つのオブジェクト
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedObject {
    pub key: &'static str,
    pub content: &'static str,
}

/// 投入するオブジェクト一覧（投入順）
pub const BUCKET_SEED: &[SeedObject] = &[
    SeedObject {
        key: "static-data/achievements.csv",
        content: "Name,CompletionCriteria,Description,ItemReward,CompletionText
Survival,player.LastScore >= 15,Survive for 15 seconds to get the Fancy Ship,FancyShip,Fancy Ship acquired!",
    },
    SeedObject {
        key: "static-data/dailygift.csv",
        content: "Date,EndDate,GiftType1,GiftName1
12/6/2015,1/1/3015,mission,ShieldMission",
    },
    SeedObject {
        key: "static-data/items.csv",
        content: "Name,Persist,Icon
Shield,false,levels/samples/dont_die/textures/spaceship_shield_01.dds
FancyShip,true,levels/samples/dont_die/textures/fancy_ship.dds",
    },
    SeedObject {
        key: "static-data/messageoftheday.csv",
        content: "Date,EndDate,Message,Color
12/6/2015,1/1/2031,Message of the Day!,3",
    },
    SeedObject {
        key: "static-data/missions.csv",
        content: "Name,CompletionText,Description,ItemReward,NumberOfGamesReq
ShieldMission,Shield acquired!,Complete 1 game to get the shield!,Shield,1",
    },
    SeedObject {
        key: "static-data/gameproperties.csv",
        content: "GameProperty,Value
Ship Speed,20
Asteroid Min Size,8
Asteroid Max Size,15",
    },
    SeedObject {
        key: "highscores",
        content: r#"{ "scores": [ ] }"#,
    },
];

/// バケット投入リソースの物理ID
pub fn populate_bucket_physical_id(stack: &StackArn) -> String {
    format!("CloudCanvas:PopulateMainBucket:{}", stack.stack_name())
}
