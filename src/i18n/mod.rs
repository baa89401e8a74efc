//! UI strings in Chinese (default) and English.
//!
//! Every user-visible label used by the charts, the filter panel, the score
//! detail view and notifications lives in a [`Labels`] table. Switching the
//! language is a state change followed by a re-render; nothing is patched
//! in place.

use serde::{Deserialize, Serialize};

use crate::scores::ScoreDimension;

/// Display language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Zh,
    En,
}

impl Lang {
    pub fn labels(self) -> &'static Labels {
        match self {
            Self::Zh => &ZH,
            Self::En => &EN,
        }
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zh => write!(f, "zh"),
            Self::En => write!(f, "en"),
        }
    }
}

/// Parse a language code (`zh`, `zh-CN`, `en`, `en-US`, ...).
pub fn parse_lang(val: &str) -> Option<Lang> {
    let lower = val.trim().to_ascii_lowercase();
    match lower.split(['-', '_']).next() {
        Some("zh") | Some("cn") => Some(Lang::Zh),
        Some("en") => Some(Lang::En),
        _ => None,
    }
}

/// One language's label table.
#[derive(Debug, Serialize)]
pub struct Labels {
    pub page_title: &'static str,
    pub stats_title: &'static str,

    // Charts
    pub radar_chart: &'static str,
    pub scatter_chart: &'static str,
    pub heatmap_chart: &'static str,
    pub trend_chart: &'static str,
    pub distribution_chart: &'static str,
    pub accuracy: &'static str,
    pub completeness: &'static str,
    pub relevance: &'static str,
    pub clarity: &'static str,
    pub total: &'static str,
    pub date: &'static str,
    pub score: &'static str,
    pub count: &'static str,
    pub range: &'static str,
    pub no_data: &'static str,

    // Score detail
    pub detail_title: &'static str,
    pub current: &'static str,
    pub history: &'static str,
    pub score_time: &'static str,
    pub no_history: &'static str,
    pub close: &'static str,

    // Filter panel
    pub filter_title: &'static str,
    pub keyword: &'static str,
    pub date_range: &'static str,
    pub start_date: &'static str,
    pub end_date: &'static str,
    pub total_score: &'static str,
    pub min_score: &'static str,
    pub max_score: &'static str,
    pub filter_name: &'static str,
    pub apply: &'static str,
    pub reset: &'static str,
    pub save: &'static str,
    pub load: &'static str,
    pub delete: &'static str,
    pub no_filters: &'static str,

    // Notifications
    pub save_success: &'static str,
    pub save_failed: &'static str,
    pub delete_success: &'static str,
    pub delete_failed: &'static str,
    pub load_success: &'static str,
    pub load_failed: &'static str,
    pub request_failed: &'static str,
}

impl Labels {
    /// Translated name of a score dimension.
    pub fn dimension(&self, dimension: ScoreDimension) -> &'static str {
        match dimension {
            ScoreDimension::Accuracy => self.accuracy,
            ScoreDimension::Completeness => self.completeness,
            ScoreDimension::Relevance => self.relevance,
            ScoreDimension::Clarity => self.clarity,
            ScoreDimension::Total => self.total,
        }
    }
}

pub static ZH: Labels = Labels {
    page_title: "问答对评分系统",
    stats_title: "评分统计",
    radar_chart: "雷达图",
    scatter_chart: "散点图",
    heatmap_chart: "热力图",
    trend_chart: "评分趋势",
    distribution_chart: "评分分布",
    accuracy: "准确性",
    completeness: "完整性",
    relevance: "相关性",
    clarity: "清晰度",
    total: "总分",
    date: "日期",
    score: "分数",
    count: "数量",
    range: "分数范围",
    no_data: "暂无数据",
    detail_title: "评分详情",
    current: "当前评分",
    history: "历史记录",
    score_time: "评分时间",
    no_history: "暂无历史记录",
    close: "关闭",
    filter_title: "筛选条件",
    keyword: "关键词",
    date_range: "日期范围",
    start_date: "开始日期",
    end_date: "结束日期",
    total_score: "总分",
    min_score: "最小分数",
    max_score: "最大分数",
    filter_name: "筛选条件名称",
    apply: "应用",
    reset: "重置",
    save: "保存筛选条件",
    load: "加载筛选条件",
    delete: "删除筛选条件",
    no_filters: "暂无保存的筛选条件",
    save_success: "保存成功",
    save_failed: "保存失败",
    delete_success: "删除成功",
    delete_failed: "删除失败",
    load_success: "加载成功",
    load_failed: "加载失败",
    request_failed: "请求失败",
};

pub static EN: Labels = Labels {
    page_title: "QA Pair Scoring System",
    stats_title: "Score Statistics",
    radar_chart: "Radar Chart",
    scatter_chart: "Scatter Chart",
    heatmap_chart: "Heatmap",
    trend_chart: "Score Trend",
    distribution_chart: "Score Distribution",
    accuracy: "Accuracy",
    completeness: "Completeness",
    relevance: "Relevance",
    clarity: "Clarity",
    total: "Total",
    date: "Date",
    score: "Score",
    count: "Count",
    range: "Score Range",
    no_data: "No Data",
    detail_title: "Score Details",
    current: "Current Score",
    history: "History",
    score_time: "Score Time",
    no_history: "No History",
    close: "Close",
    filter_title: "Filter",
    keyword: "Keyword",
    date_range: "Date Range",
    start_date: "Start Date",
    end_date: "End Date",
    total_score: "Total Score",
    min_score: "Min Score",
    max_score: "Max Score",
    filter_name: "Filter Name",
    apply: "Apply",
    reset: "Reset",
    save: "Save Filter",
    load: "Load Filter",
    delete: "Delete Filter",
    no_filters: "No saved filters",
    save_success: "Saved successfully",
    save_failed: "Failed to save",
    delete_success: "Deleted successfully",
    delete_failed: "Failed to delete",
    load_success: "Loaded successfully",
    load_failed: "Failed to load",
    request_failed: "Request failed",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lang_handles_variants() {
        assert_eq!(parse_lang("zh"), Some(Lang::Zh));
        assert_eq!(parse_lang("zh-CN"), Some(Lang::Zh));
        assert_eq!(parse_lang("EN"), Some(Lang::En));
        assert_eq!(parse_lang("en_US"), Some(Lang::En));
        assert_eq!(parse_lang("fr"), None);
    }

    #[test]
    fn dimension_labels_follow_language() {
        assert_eq!(Lang::En.labels().dimension(ScoreDimension::Clarity), "Clarity");
        assert_eq!(Lang::Zh.labels().dimension(ScoreDimension::Total), "总分");
    }

    #[test]
    fn default_language_is_chinese() {
        assert_eq!(Lang::default(), Lang::Zh);
    }

    #[test]
    fn no_label_is_blank() {
        for labels in [&ZH, &EN] {
            let value = serde_json::to_value(labels).unwrap();
            for (key, text) in value.as_object().unwrap() {
                assert!(
                    !text.as_str().unwrap_or_default().is_empty(),
                    "label {key} is empty"
                );
            }
        }
    }
}
