use chrono::{Duration, Local, NaiveDate};
use serde::Serialize;

/// Steps each daily mission is measured in.
pub const MISSION_STEPS: u32 = 3;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatCard {
    pub icon: &'static str,
    pub title: &'static str,
    pub value: &'static str,
    pub trend: &'static str,
    pub accent: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Mission {
    pub title: &'static str,
    pub points: u32,
    pub progress: u32,
}

impl Mission {
    pub fn percent_complete(&self) -> u32 {
        (self.progress.min(MISSION_STEPS) * 100) / MISSION_STEPS
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Achievement {
    pub title: &'static str,
    pub description: &'static str,
    pub days_ago: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AchievementEntry {
    pub title: &'static str,
    pub description: &'static str,
    pub earned_on: String,
    pub when: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub today: String,
    pub stats: Vec<StatCard>,
    pub missions: Vec<Mission>,
    pub achievements: Vec<AchievementEntry>,
}

pub const STAT_CARDS: [StatCard; 4] = [
    StatCard {
        icon: "\u{1F3C6}",
        title: "Total Points",
        value: "1,250",
        trend: "+150 today",
        accent: "gold",
    },
    StatCard {
        icon: "\u{1F3AF}",
        title: "Missions Completed",
        value: "8/10",
        trend: "80% complete",
        accent: "primary",
    },
    StatCard {
        icon: "\u{1F4D8}",
        title: "Standards Learned",
        value: "15",
        trend: "3 this week",
        accent: "secondary",
    },
    StatCard {
        icon: "\u{1F4C5}",
        title: "Daily Streak",
        value: "5 days",
        trend: "Personal best!",
        accent: "accent",
    },
];

pub const DAILY_MISSIONS: [Mission; 3] = [
    Mission { title: "Complete Safety Standards Quiz", points: 100, progress: 0 },
    Mission { title: "Watch 2 Videos on Quality Control", points: 50, progress: 1 },
    Mission { title: "Find 3 Easter Eggs", points: 75, progress: 2 },
];

pub const RECENT_ACHIEVEMENTS: [Achievement; 3] = [
    Achievement {
        title: "Standards Champion",
        description: "Completed all basic safety standards modules",
        days_ago: 2,
    },
    Achievement {
        title: "Quick Learner",
        description: "Watched 5 videos in one day",
        days_ago: 3,
    },
    Achievement {
        title: "Perfect Score",
        description: "Scored 100% in Quality Control quiz",
        days_ago: 7,
    },
];

pub fn build_dashboard() -> DashboardView {
    build_dashboard_at(Local::now().date_naive())
}

pub fn build_dashboard_at(today: NaiveDate) -> DashboardView {
    let achievements = RECENT_ACHIEVEMENTS
        .iter()
        .map(|achievement| AchievementEntry {
            title: achievement.title,
            description: achievement.description,
            earned_on: (today - Duration::days(achievement.days_ago)).to_string(),
            when: relative_label(achievement.days_ago),
        })
        .collect();

    DashboardView {
        today: today.to_string(),
        stats: STAT_CARDS.to_vec(),
        missions: DAILY_MISSIONS.to_vec(),
        achievements,
    }
}

fn relative_label(days_ago: i64) -> String {
    match days_ago {
        i64::MIN..=0 => "today".to_string(),
        1 => "yesterday".to_string(),
        2..=6 => format!("{days_ago} days ago"),
        7..=13 => "1 week ago".to_string(),
        _ => format!("{} weeks ago", days_ago / 7),
    }
}
