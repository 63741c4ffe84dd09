//! Static weather-code tables, one per provider.

/// WMO weather interpretation codes as reported by Open-Meteo.
pub(super) const OPEN_METEO: &[(i64, &str, &str)] = &[
    (0, "Clear sky", "☀️"),
    (1, "Mainly clear", "🌤️"),
    (2, "Partly cloudy", "⛅"),
    (3, "Overcast", "☁️"),
    (45, "Fog", "🌫️"),
    (48, "Depositing rime fog", "🌫️"),
    (51, "Light drizzle", "🌧️"),
    (53, "Moderate drizzle", "🌧️"),
    (55, "Dense drizzle", "🌧️"),
    (56, "Light freezing drizzle", "🌧️"),
    (57, "Dense freezing drizzle", "🌧️"),
    (61, "Slight rain", "🌧️"),
    (63, "Moderate rain", "🌧️"),
    (65, "Heavy rain", "🌧️"),
    (66, "Light freezing rain", "🌧️"),
    (67, "Heavy freezing rain", "🌧️"),
    (71, "Slight snowfall", "❄️"),
    (73, "Moderate snowfall", "❄️"),
    (75, "Heavy snowfall", "❄️"),
    (77, "Snow grains", "🌨️"),
    (80, "Slight rain showers", "🌦️"),
    (81, "Moderate rain showers", "🌦️"),
    (82, "Violent rain showers", "🌦️"),
    (85, "Slight snow showers", "🌨️"),
    (86, "Heavy snow showers", "🌨️"),
    (95, "Thunderstorm", "⛈️"),
    (96, "Thunderstorm with slight hail", "⛈️"),
    (99, "Thunderstorm with heavy hail", "⛈️"),
];

/// OpenWeatherMap condition IDs.
pub(super) const OPEN_WEATHER_MAP: &[(i64, &str, &str)] = &[
    (200, "Thunderstorm with light rain", "⛈️"),
    (201, "Thunderstorm with rain", "⛈️"),
    (202, "Thunderstorm with heavy rain", "⛈️"),
    (210, "Light thunderstorm", "🌩️"),
    (211, "Thunderstorm", "🌩️"),
    (212, "Heavy thunderstorm", "🌩️"),
    (221, "Ragged thunderstorm", "🌩️"),
    (230, "Thunderstorm with light drizzle", "⛈️"),
    (231, "Thunderstorm with drizzle", "⛈️"),
    (232, "Thunderstorm with heavy drizzle", "⛈️"),
    (300, "Light intensity drizzle", "🌧️"),
    (301, "Drizzle", "🌧️"),
    (302, "Heavy intensity drizzle", "🌧️"),
    (310, "Light intensity drizzle rain", "🌧️"),
    (311, "Drizzle rain", "🌧️"),
    (312, "Heavy intensity drizzle rain", "🌧️"),
    (313, "Shower rain and drizzle", "🌧️"),
    (314, "Heavy shower rain and drizzle", "🌧️"),
    (321, "Shower drizzle", "🌧️"),
    (500, "Light rain", "🌦️"),
    (501, "Moderate rain", "🌧️"),
    (502, "Heavy intensity rain", "🌧️"),
    (503, "Very heavy rain", "🌧️"),
    (504, "Extreme rain", "🌧️"),
    (511, "Freezing rain", "🌧️"),
    (520, "Light intensity shower rain", "🌦️"),
    (521, "Shower rain", "🌦️"),
    (522, "Heavy intensity shower rain", "🌦️"),
    (531, "Ragged shower rain", "🌦️"),
    (600, "Light snow", "❄️"),
    (601, "Snow", "❄️"),
    (602, "Heavy snow", "❄️"),
    (611, "Sleet", "🌨️"),
    (612, "Light shower sleet", "🌨️"),
    (613, "Shower sleet", "🌨️"),
    (615, "Light rain and snow", "🌨️"),
    (616, "Rain and snow", "🌨️"),
    (620, "Light shower snow", "🌨️"),
    (621, "Shower snow", "🌨️"),
    (622, "Heavy shower snow", "🌨️"),
    (701, "Mist", "🌫️"),
    (711, "Smoke", "🌫️"),
    (721, "Haze", "🌫️"),
    (731, "Sand and dust whirls", "🌪️"),
    (741, "Fog", "🌫️"),
    (751, "Sand", "🌪️"),
    (761, "Dust", "🌪️"),
    (762, "Volcanic ash", "🌋"),
    (771, "Squalls", "🌬️"),
    (781, "Tornado", "🌪️"),
    (800, "Clear sky", "☀️"),
    (801, "Few clouds", "🌤️"),
    (802, "Scattered clouds", "⛅"),
    (803, "Broken clouds", "☁️"),
    (804, "Overcast clouds", "☁️"),
];

/// WeatherAPI.com condition codes.
pub(super) const WEATHER_API: &[(i64, &str, &str)] = &[
    (1000, "Clear", "☀️"),
    (1003, "Partly cloudy", "🌤️"),
    (1006, "Cloudy", "⛅"),
    (1009, "Overcast", "☁️"),
    (1030, "Mist", "🌫️"),
    (1063, "Patchy rain possible", "🌦️"),
    (1066, "Patchy snow possible", "🌨️"),
    (1069, "Patchy sleet possible", "🌧️"),
    (1072, "Patchy freezing drizzle possible", "🌧️"),
    (1087, "Thundery outbreaks possible", "⛈️"),
    (1114, "Blowing snow", "❄️"),
    (1117, "Blizzard", "🌨️"),
    (1135, "Fog", "🌫️"),
    (1147, "Freezing fog", "🌫️"),
    (1150, "Patchy light drizzle", "🌧️"),
    (1153, "Light drizzle", "🌧️"),
    (1168, "Freezing drizzle", "🌧️"),
    (1171, "Heavy freezing drizzle", "🌧️"),
    (1180, "Patchy light rain", "🌦️"),
    (1183, "Light rain", "🌦️"),
    (1186, "Moderate rain at times", "🌦️"),
    (1189, "Moderate rain", "🌦️"),
    (1192, "Heavy rain at times", "🌧️"),
    (1195, "Heavy rain", "🌧️"),
    (1198, "Light freezing rain", "🌧️"),
    (1201, "Moderate or heavy freezing rain", "🌧️"),
    (1204, "Light sleet", "🌧️"),
    (1207, "Moderate or heavy sleet", "🌧️"),
    (1210, "Patchy light snow", "❄️"),
    (1213, "Light snow", "❄️"),
    (1216, "Patchy moderate snow", "❄️"),
    (1219, "Moderate snow", "❄️"),
    (1222, "Patchy heavy snow", "❄️"),
    (1225, "Heavy snow", "❄️"),
    (1237, "Ice pellets", "🌨️"),
    (1240, "Light rain shower", "🌦️"),
    (1243, "Moderate or heavy rain shower", "🌧️"),
    (1246, "Torrential rain shower", "🌧️"),
    (1249, "Light sleet showers", "🌧️"),
    (1252, "Moderate or heavy sleet showers", "🌧️"),
    (1255, "Light snow showers", "❄️"),
    (1258, "Moderate or heavy snow showers", "❄️"),
    (1261, "Light showers of ice pellets", "❄️"),
    (1264, "Moderate or heavy showers of ice pellets", "❄️"),
    (1273, "Patchy light rain with thunder", "⛈️"),
    (1276, "Moderate or heavy rain with thunder", "⛈️"),
    (1279, "Patchy light snow with thunder", "⛈️"),
    (1282, "Moderate or heavy snow with thunder", "⛈️"),
];

/// AMap reports conditions as Chinese text; the text itself is the code.
pub(super) const AMAP: &[(&str, &str, &str)] = &[
    ("晴", "Clear", "☀️"),
    ("少云", "Few clouds", "🌤️"),
    ("晴间多云", "Partly cloudy", "🌤️"),
    ("多云", "Cloudy", "⛅"),
    ("阴", "Overcast", "☁️"),
    ("阵雨", "Showers", "🌦️"),
    ("雷阵雨", "Thundershowers", "⛈️"),
    ("雷阵雨并伴有冰雹", "Thundershowers with hail", "⛈️"),
    ("雨夹雪", "Sleet", "🌧️"),
    ("小雨", "Light rain", "🌧️"),
    ("中雨", "Moderate rain", "🌧️"),
    ("大雨", "Heavy rain", "🌧️"),
    ("暴雨", "Rainstorm", "🌧️"),
    ("大暴雨", "Heavy rainstorm", "🌧️"),
    ("特大暴雨", "Severe rainstorm", "🌧️"),
    ("小雪", "Light snow", "❄️"),
    ("中雪", "Moderate snow", "❄️"),
    ("大雪", "Heavy snow", "❄️"),
    ("暴雪", "Snowstorm", "❄️"),
    ("雾", "Fog", "🌫️"),
    ("冻雨", "Freezing rain", "🌧️"),
    ("沙尘暴", "Sandstorm", "🌪️"),
    ("霾", "Haze", "🌫️"),
    ("中度霾", "Moderate haze", "🌫️"),
    ("重度霾", "Heavy haze", "🌫️"),
    ("严重霾", "Severe haze", "🌫️"),
    ("大雾", "Dense fog", "🌫️"),
    ("强浓雾", "Thick fog", "🌫️"),
    ("特强浓雾", "Extremely thick fog", "🌫️"),
    ("浮尘", "Floating dust", "🌫️"),
    ("扬沙", "Blowing sand", "🌪️"),
    ("强沙尘暴", "Severe sandstorm", "🌪️"),
];
