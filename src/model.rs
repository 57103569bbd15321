use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub student_id: String,
    pub grade: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub parent_name: String,
    #[serde(default)]
    pub parent_phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default)]
    pub enrollment_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub teacher_id: String,
    pub subject: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub hire_date: String,
    #[serde(default)]
    pub salary: i64,
    #[serde(default)]
    pub classes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub date: String,
    pub status: AttendanceStatus,
    pub grade: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub subject: String,
    pub exam_type: ExamType,
    pub score: i64,
    pub max_score: i64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub teacher_id: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "present" => Some(Self::Present),
            "absent" => Some(Self::Absent),
            "late" => Some(Self::Late),
            "excused" => Some(Self::Excused),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Late => "late",
            Self::Excused => "excused",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamType {
    Midterm,
    Final,
    Quiz,
    Assignment,
    Participation,
}

impl ExamType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Midterm => "midterm",
            Self::Final => "final",
            Self::Quiz => "quiz",
            Self::Assignment => "assignment",
            Self::Participation => "participation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    Parent,
}

impl Role {
    /// Demonstration stand-in, not authentication: the role is declared by
    /// the username itself. Marker order matters ("parentteacher" is a
    /// teacher, matching the original check sequence).
    pub fn from_username(username: &str) -> Self {
        if username.contains("admin") {
            Self::Admin
        } else if username.contains("teacher") {
            Self::Teacher
        } else if username.contains("parent") {
            Self::Parent
        } else {
            Self::Student
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
            Self::Student => "student",
            Self::Parent => "parent",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewId {
    Dashboard,
    Students,
    Teachers,
    Attendance,
    Grades,
}

impl ViewId {
    pub const ALL: [ViewId; 5] = [
        Self::Dashboard,
        Self::Students,
        Self::Teachers,
        Self::Attendance,
        Self::Grades,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dashboard" => Some(Self::Dashboard),
            "students" => Some(Self::Students),
            "teachers" => Some(Self::Teachers),
            "attendance" => Some(Self::Attendance),
            "grades" => Some(Self::Grades),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Students => "students",
            Self::Teachers => "teachers",
            Self::Attendance => "attendance",
            Self::Grades => "grades",
        }
    }

    /// Which roles see this view in their navigation. Consulted only when
    /// listing views; data access is never gated on it.
    pub fn allows(self, role: Role) -> bool {
        match self {
            Self::Dashboard | Self::Grades => true,
            Self::Students | Self::Attendance => {
                matches!(role, Role::Admin | Role::Teacher)
            }
            Self::Teachers => role == Role::Admin,
        }
    }
}
